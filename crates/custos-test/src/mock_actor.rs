//! Mock actor and resource builders for tests.
//!
//! These builders offer sensible defaults so tests only spell out what they
//! care about. Unlike the production builders they return values directly
//! and panic on invalid input.
//!
//! # Examples
//!
//! ```rust
//! use custos_test::{MockActor, MockResource};
//!
//! let admin = MockActor::admin();
//! let support = MockActor::new("agent-7")
//!     .with_roles(["support"])
//!     .impersonating("customer-1")
//!     .build();
//!
//! let comment = MockResource::new("comment", "c-1")
//!     .within("task", "t-1")
//!     .within("project", "p-1")
//!     .build();
//! assert_eq!(comment.full_path(), "project:p-1/task:t-1/comment:c-1");
//! ```

use custos_core::{Actor, ActorBuilder, ActorType, Resource, ResourceBuilder};

/// Builder for mock actors.
#[derive(Debug, Clone)]
pub struct MockActor {
    actor_type: ActorType,
    user_id: Option<String>,
    roles: Vec<String>,
    session_id: Option<String>,
    ip_address: Option<String>,
    on_behalf_of: Option<String>,
}

impl MockActor {
    /// Creates a user actor builder with the given user ID.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            actor_type: ActorType::User,
            user_id: Some(user_id.into()),
            roles: Vec::new(),
            session_id: None,
            ip_address: None,
            on_behalf_of: None,
        }
    }

    /// Creates a user with the "admin" role.
    ///
    /// User ID defaults to "mock-admin".
    #[must_use]
    pub fn admin() -> Actor {
        Self::new("mock-admin").with_role("admin").build()
    }

    /// Creates a user with the "viewer" role.
    ///
    /// User ID defaults to "mock-viewer".
    #[must_use]
    pub fn viewer() -> Actor {
        Self::new("mock-viewer").with_role("viewer").build()
    }

    /// Creates an anonymous system actor.
    #[must_use]
    pub fn system() -> Actor {
        Self {
            actor_type: ActorType::System,
            user_id: None,
            ..Self::new("")
        }
        .build()
    }

    /// Creates a service account actor.
    #[must_use]
    pub fn service(account_id: impl Into<String>) -> Actor {
        Self {
            actor_type: ActorType::ServiceAccount,
            ..Self::new(account_id)
        }
        .build()
    }

    /// Adds a single role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Sets the roles, replacing any existing roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the session ID.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets the client IP address.
    #[must_use]
    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Marks the actor as acting on behalf of another user.
    #[must_use]
    pub fn impersonating(mut self, user_id: impl Into<String>) -> Self {
        self.on_behalf_of = Some(user_id.into());
        self
    }

    /// Builds the [`Actor`].
    ///
    /// # Panics
    ///
    /// Panics if the delegating user ID is empty.
    #[must_use]
    pub fn build(self) -> Actor {
        let mut builder = ActorBuilder::new(self.actor_type).roles(self.roles);
        if let Some(user_id) = self.user_id {
            builder = builder.user_id(user_id);
        }
        if let Some(session_id) = self.session_id {
            builder = builder.session_id(session_id);
        }
        if let Some(ip_address) = self.ip_address {
            builder = builder.ip_address(ip_address);
        }
        if let Some(user_id) = self.on_behalf_of {
            builder = builder.on_behalf_of(user_id);
        }
        builder
            .build()
            .unwrap_or_else(|e| panic!("invalid mock actor: {e}"))
    }
}

/// Builder for mock resources and their parent chains.
#[derive(Debug, Clone)]
pub struct MockResource {
    resource_type: String,
    id: String,
    display_name: Option<String>,
    ancestors: Vec<(String, String)>,
}

impl MockResource {
    /// Creates a resource builder.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            display_name: None,
            ancestors: Vec::new(),
        }
    }

    /// Creates a standalone order resource.
    #[must_use]
    pub fn order(id: impl Into<String>) -> Resource {
        Self::new("order", id).build()
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Adds an enclosing resource. Call repeatedly, innermost first.
    #[must_use]
    pub fn within(mut self, resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.ancestors.push((resource_type.into(), id.into()));
        self
    }

    /// Builds the [`Resource`] with its parent chain.
    ///
    /// # Panics
    ///
    /// Panics if any type or id in the chain is empty.
    #[must_use]
    pub fn build(self) -> Resource {
        let mut parent: Option<Resource> = None;
        for (resource_type, id) in self.ancestors.into_iter().rev() {
            parent = Some(link(ResourceBuilder::new(resource_type, id), parent));
        }

        let mut builder = ResourceBuilder::new(self.resource_type, self.id);
        if let Some(name) = self.display_name {
            builder = builder.display_name(name);
        }
        link(builder, parent)
    }
}

fn link(builder: ResourceBuilder, parent: Option<Resource>) -> Resource {
    let builder = match parent {
        Some(parent) => builder.parent(parent),
        None => builder,
    };
    builder
        .build()
        .unwrap_or_else(|e| panic!("invalid mock resource: {e}"))
}
