//! Shared test helpers for license tests.

mod mock_authority;

#[allow(unused_imports)]
pub use mock_authority::MockAuthority;

use storyreel_license::KeyCodec;

/// Codec used across license tests.
#[allow(dead_code)]
pub fn test_codec() -> KeyCodec {
    KeyCodec::new("REEL", "UNLIMITED", "integration-test-secret")
}
