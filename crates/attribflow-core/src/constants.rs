/// Application constants
///
/// This module contains all hardcoded values used throughout the application.
/// Constants are organized by category for easy maintenance.
use std::time::Duration;

// ============================================================================
// Eligibility Constants
// ============================================================================

/// Prefix a customer tag must carry (case-insensitively) to count as Pro
pub const PRO_TAG_PREFIX: &str = "pro";

/// Reserved membership-tier tags that never qualify as a Pro designation
pub const BLACKLISTED_TAGS: &[&str] = &["membre-pro", "membre-premium", "membre-gratuit"];

/// A Pro tag must be strictly longer than this (more than just "pro")
pub const MIN_PRO_TAG_LEN: usize = 3;

// ============================================================================
// Store TTLs & Windows
// ============================================================================

/// Lifetime of attribution records in the ephemeral store (60 minutes)
pub const ATTRIBUTION_TTL: Duration = Duration::from_secs(60 * 60);

/// Lifetime of session heartbeat records (30 minutes)
pub const HEARTBEAT_TTL: Duration = Duration::from_secs(30 * 60);

/// How recent a heartbeat must be to serve as a last-resort attribution (5 minutes)
pub const HEARTBEAT_RECENCY_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Per-(customer, action) cooldown suppressing rapid-fire tracking calls
pub const ACTION_COOLDOWN: Duration = Duration::from_secs(5);

/// Per-product debounce collapsing bursts of near-duplicate webhook deliveries
pub const WEBHOOK_DEBOUNCE: Duration = Duration::from_secs(10);

// ============================================================================
// Retry Configuration
// ============================================================================

/// Attempts for the storefront read/write during reconciliation
pub const RECONCILE_MAX_ATTEMPTS: u32 = 6;

/// Fixed delay between reconciliation attempts in milliseconds
pub const RECONCILE_RETRY_DELAY_MS: u64 = 1500;

/// Attempts for webhook-side attribution resolution
pub const RESOLVER_MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between resolution attempts in milliseconds
pub const RESOLVER_RETRY_DELAY_MS: u64 = 2000;

// ============================================================================
// Marking Tags & Titles
// ============================================================================

/// Tag suffix encoding "one marking location"
pub const MARK_ONE_SUFFIX: &str = "-1M";

/// Tag suffix encoding "two marking locations"
pub const MARK_TWO_SUFFIX: &str = "-2M";

/// Title annotation appended when a product carries two markings
pub const TWO_MARKINGS_TITLE_SUFFIX: &str = " - 2 marquages";

/// Transient workflow marker flagging a product awaiting attribution
pub const PENDING_ATTRIBUTION_TAG: &str = "attribution-pending";

// ============================================================================
// Storefront Webhook
// ============================================================================

/// Header carrying the base64 HMAC-SHA256 signature over the raw body
pub const WEBHOOK_HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Header naming the webhook event topic
pub const WEBHOOK_TOPIC_HEADER: &str = "x-shopify-topic";

/// Webhook topics the service reacts to
pub const TOPIC_PRODUCT_CREATE: &str = "products/create";
pub const TOPIC_PRODUCT_UPDATE: &str = "products/update";

// ============================================================================
// Design-Tool Product Family
// ============================================================================

/// Product type assigned by the design tool to customized products
pub const DESIGN_PRODUCT_TYPE: &str = "zakeke-design";

/// Vendor assigned by the design tool to customized products
pub const DESIGN_VENDOR: &str = "Zakeke";

/// Tag marking a product as design-tool-generated
pub const DESIGN_TAG: &str = "zakeke";

// ============================================================================
// Storefront API
// ============================================================================

/// Admin API version used when SHOPIFY_API_VERSION is not set
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Prefix of storefront product global ids
pub const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

// ============================================================================
// CORS
// ============================================================================

/// Origin allowlist used when ALLOWED_ORIGIN_REGEX is not set
pub const DEFAULT_ALLOWED_ORIGIN_REGEX: &str = r"^https://([a-z0-9-]+\.)*lefagoteur\.com$";
