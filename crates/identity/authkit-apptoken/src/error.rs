use thiserror::Error;

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenFault {
    Expired,
    IssuerMismatch,
    BadSignature,
    AlgorithmMismatch,
    Malformed(String),
}

impl std::fmt::Display for TokenFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenFault::Expired => write!(f, "token expired"),
            TokenFault::IssuerMismatch => write!(f, "issuer mismatch"),
            TokenFault::BadSignature => write!(f, "bad signature"),
            TokenFault::AlgorithmMismatch => write!(f, "unexpected signing method"),
            TokenFault::Malformed(reason) => write!(f, "malformed token: {reason}"),
        }
    }
}

/// A state or email token could not be created or parsed.
///
/// Every rejection is reported as this one error; the fault keeps the cause
/// introspectable so callers can special-case expired links.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid token: {fault}")]
pub struct InvalidToken {
    pub fault: TokenFault,
}

impl InvalidToken {
    pub fn new(fault: TokenFault) -> Self {
        Self { fault }
    }

    pub fn is_expired(&self) -> bool {
        self.fault == TokenFault::Expired
    }
}

impl From<jsonwebtoken::errors::Error> for InvalidToken {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let fault = match err.kind() {
            ErrorKind::ExpiredSignature => TokenFault::Expired,
            ErrorKind::InvalidIssuer => TokenFault::IssuerMismatch,
            ErrorKind::InvalidSignature => TokenFault::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenFault::AlgorithmMismatch
            }
            _ => TokenFault::Malformed(err.to_string()),
        };
        InvalidToken::new(fault)
    }
}

pub type TokenResult<T> = Result<T, InvalidToken>;
