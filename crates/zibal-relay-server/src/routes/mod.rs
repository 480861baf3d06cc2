pub mod callback;
pub mod docs;
pub mod health;
pub mod redirect;
