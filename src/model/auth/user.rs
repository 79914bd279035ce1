use std::fmt::{self, Display, Formatter};

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::{admin::Admin, mongodb::Id, student::Student};

/// A user type that can hold an authenticated session.
pub trait User {
    /// The rights this user type is granted.
    const RIGHTS: Rights;

    /// The user's unique ID.
    fn id(&self) -> Id;
}

/// What a session is allowed to do.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Student = 0,
    Admin = 1,
}

impl Display for Rights {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Student => "student",
                Self::Admin => "admin",
            }
        )
    }
}

impl User for Student {
    const RIGHTS: Rights = Rights::Student;

    fn id(&self) -> Id {
        self.id
    }
}

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> Id {
        self.id
    }
}
