// handlers/mod.rs - HTTP handlers grouped by security level
//
// public:    no token required (signup, login)
// protected: JWT required; the caller's AuthUser is injected by middleware

pub mod protected;
pub mod public;
