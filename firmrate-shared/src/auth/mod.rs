/// Authentication and authorization
///
/// - `password`: Argon2id hashing with configurable cost
/// - `jwt`: HS256 access/refresh tokens
/// - `middleware`: AuthContext carried in request extensions
/// - `authorization`: admin and ownership guards

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
