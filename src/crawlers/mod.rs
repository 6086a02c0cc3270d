pub mod discover;
pub mod driver;
pub mod fetch;
pub mod web;

#[cfg(test)]
mod tests;

pub use driver::{PageDriver, RenderedPage, WebDriverSession};
pub use fetch::{AssetFetcher, FetchAsset};
pub use web::{VisitedSet, crawl, crawl_site};
