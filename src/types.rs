use std::fmt::{self, Display};

use secrecy::SecretString;

/// Which remote operation the reconciled payload maps to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    /// Remote procedure name for the operation.
    #[must_use]
    pub const fn rpc_name(self) -> &'static str {
        match self {
            Self::Create => "TicketCreate",
            Self::Update => "TicketUpdate",
        }
    }

    /// Key of the response object the gateway must find in the envelope.
    #[must_use]
    pub const fn response_key(self) -> &'static str {
        match self {
            Self::Create => "TicketCreateResponse",
            Self::Update => "TicketUpdateResponse",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// Requester credentials for the ticket service.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

#[cfg(test)]
mod tests {
    use super::Operation;

    #[test]
    fn rpc_names_mirror_operation_kind() {
        assert_eq!(Operation::Create.rpc_name(), "TicketCreate");
        assert_eq!(Operation::Update.rpc_name(), "TicketUpdate");
        assert_eq!(Operation::Create.response_key(), "TicketCreateResponse");
        assert_eq!(Operation::Update.response_key(), "TicketUpdateResponse");
    }
}
