//! Fixed test constants.

/// Token signing secret used by every test server (32 bytes).
pub const TEST_TOKEN_SECRET: &str = "lms-test-secret-do-not-use-0000000";

/// A different secret, for tokens that must fail signature checks.
pub const TEST_FOREIGN_SECRET: &str = "some-other-service-secret-99999999";

/// Password given to users created through the harness.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// Client addresses for rate limit tests
pub const TEST_CLIENT_IP_1: &str = "203.0.113.10";
pub const TEST_CLIENT_IP_2: &str = "203.0.113.20";

// Usernames
pub const TEST_USER_ALICE: &str = "alice";
pub const TEST_USER_DOSEN: &str = "pak_budi";
pub const TEST_USER_ADMIN: &str = "root";
