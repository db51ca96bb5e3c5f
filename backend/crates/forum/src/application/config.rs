//! Application Configuration
//!
//! Configuration for the Forum application layer.

use kernel::pagination::PageRequest;
use platform::rate_limit::RateLimitConfig;

/// Forum application configuration
#[derive(Debug, Clone)]
pub struct ForumConfig {
    /// Page size when the request does not give one
    pub page_size_default: u32,
    /// Upper bound for a requested page size
    pub page_size_max: u32,
    /// Per-IP budget shared by every forum route
    pub rate_limit: RateLimitConfig,
    /// Per-account budget for `POST /posts`
    pub create_post_limit: RateLimitConfig,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            page_size_default: 10,
            page_size_max: 100,
            rate_limit: RateLimitConfig::default(),
            create_post_limit: RateLimitConfig::new(10, 60 * 60),
        }
    }
}

impl ForumConfig {
    pub fn new(page_size_default: u32, page_size_max: u32) -> Self {
        Self {
            page_size_default: page_size_default.max(1),
            page_size_max: page_size_max.max(page_size_default).max(1),
            ..Self::default()
        }
    }

    /// Small pages, handy when paging through a dev database by hand
    pub fn development() -> Self {
        Self::new(5, 100)
    }

    pub fn with_rate_limits(mut self, general: RateLimitConfig, create_post: RateLimitConfig) -> Self {
        self.rate_limit = general;
        self.create_post_limit = create_post;
        self
    }

    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        PageRequest::new(page, limit, self.page_size_default, self.page_size_max)
    }
}
