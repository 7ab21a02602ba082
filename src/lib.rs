pub mod cache;
pub mod cms;
pub mod config;
pub mod i18n;
pub mod retry;
pub mod revalidate;
pub mod routes;
pub mod security;
pub mod seo;
pub mod server;
