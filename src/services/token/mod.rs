pub mod claims;
pub mod codec;
pub mod factory;
pub mod issuer;
pub mod jwt;

pub use claims::{ClaimsError, TokenClaims, token_id};
pub use codec::{CodecError, TokenCodec};
pub use factory::build_jwt_codec;
pub use issuer::{IssueError, IssuedToken, TokenIssuer};
pub use jwt::JwtCodec;
