use super::*;

// =============================================================================
// capture / login_url
// =============================================================================

#[test]
fn login_url_percent_encodes_return_path() {
    let rp = ReturnPath::capture(Some("/account/orders"), "/account");
    assert_eq!(rp.login_url("/login"), "/login?returnUrl=%2Faccount%2Forders");
}

#[test]
fn login_url_encodes_query_characters() {
    let rp = ReturnPath::capture(Some("/account/orders?page=2&sort=new"), "/account");
    assert_eq!(
        rp.login_url("/login"),
        "/login?returnUrl=%2Faccount%2Forders%3Fpage%3D2%26sort%3Dnew"
    );
}

#[test]
fn capture_falls_back_when_path_missing() {
    assert_eq!(ReturnPath::capture(None, "/account").as_str(), "/account");
    assert_eq!(ReturnPath::capture(Some(""), "/account").as_str(), "/account");
    assert_eq!(ReturnPath::capture(Some("   "), "/account").as_str(), "/account");
}

// =============================================================================
// consume
// =============================================================================

#[test]
fn consume_follows_local_paths() {
    let rp = ReturnPath::capture(Some("/account/orders?page=2"), "/account");
    assert_eq!(rp.consume(), "/account/orders?page=2");
}

#[test]
fn consume_refuses_offsite_targets() {
    for raw in ["https://evil.example", "//evil.example/x", "/\\evil.example", "javascript:alert(1)"] {
        let rp = ReturnPath::capture(Some(raw), "/account");
        assert_eq!(rp.consume(), "/", "{raw} should not be followed");
    }
}
