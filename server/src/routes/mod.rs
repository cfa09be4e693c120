mod app_router;
pub mod classify;

pub use app_router::AppRouter;
