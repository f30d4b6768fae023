// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/contacts
// Middleware: jwt_auth_middleware, which rejects the request with 401 before
// any handler here runs unless the bearer token verifies.

pub mod contacts;
