use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration as ChronoDuration;
use credential_core::{AuthError, Claims, SecretKey, TokenService, MAX_TOKEN_TTL};
use serde_json::json;

use crate::test_utils::{fixed_now, sample_claims, test_secret, test_tokens, ONE_HOUR};

fn issue_sample() -> String {
    TokenService::issue_at(&sample_claims(), &test_secret(), ONE_HOUR, fixed_now()).unwrap()
}

#[test]
fn test_valerie_round_trip() {
    let token = issue_sample();
    let verified = TokenService::verify_at(&token, &test_secret(), fixed_now()).unwrap();

    assert_eq!(verified.claims.get("name"), Some(&json!("valerie")));
    assert_eq!(verified.claims.get("id"), Some(&json!("1234")));
    assert_eq!(verified.claims.len(), 2);
    assert_eq!(verified.issued_at, fixed_now());
    assert_eq!(verified.expires_at, fixed_now() + ChronoDuration::hours(1));
}

#[test]
fn test_wrong_secret_is_invalid_signature() {
    let token = issue_sample();
    let wrong = SecretKey::from("wrong-secret");

    assert!(matches!(
        TokenService::verify_at(&token, &wrong, fixed_now()),
        Err(AuthError::InvalidSignature)
    ));
}

#[test]
fn test_expired_after_ttl() {
    let token = issue_sample();

    let later = fixed_now() + ChronoDuration::hours(1);
    assert!(matches!(
        TokenService::verify_at(&token, &test_secret(), later),
        Err(AuthError::Expired)
    ));

    let much_later = fixed_now() + ChronoDuration::days(30);
    assert!(matches!(
        TokenService::verify_at(&token, &test_secret(), much_later),
        Err(AuthError::Expired)
    ));
}

#[test]
fn test_various_claims_round_trip() {
    let mut nested = Claims::new();
    nested.insert("roles".to_string(), json!(["admin", "user"]));
    nested.insert("profile".to_string(), json!({"age": 42, "verified": true}));
    nested.insert("score".to_string(), json!(1.5));
    nested.insert("nothing".to_string(), json!(null));

    for claims in [Claims::new(), sample_claims(), nested] {
        let token =
            TokenService::issue_at(&claims, &test_secret(), ONE_HOUR, fixed_now()).unwrap();
        let verified = TokenService::verify_at(&token, &test_secret(), fixed_now()).unwrap();
        assert_eq!(verified.claims, claims);
    }
}

#[test]
fn test_flipping_any_claims_bit_breaks_signature() {
    let token = issue_sample();
    let segments: Vec<&str> = token.split('.').collect();
    let payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();

    for byte in 0..payload.len() {
        for bit in 0..8 {
            let mut flipped = payload.clone();
            flipped[byte] ^= 1 << bit;

            let forged = format!(
                "{}.{}.{}",
                segments[0],
                URL_SAFE_NO_PAD.encode(&flipped),
                segments[2]
            );

            assert!(
                matches!(
                    TokenService::verify_at(&forged, &test_secret(), fixed_now()),
                    Err(AuthError::InvalidSignature)
                ),
                "flip of byte {byte} bit {bit} was not rejected"
            );
        }
    }
}

#[test]
fn test_forged_expiry_is_rejected() {
    let token = issue_sample();
    let segments: Vec<&str> = token.split('.').collect();

    let extended = json!({
        "exp": fixed_now().timestamp() + 365 * 24 * 3600,
        "iat": fixed_now().timestamp(),
        "id": "1234",
        "name": "valerie",
    });
    let forged = format!(
        "{}.{}.{}",
        segments[0],
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&extended).unwrap()),
        segments[2]
    );

    let later = fixed_now() + ChronoDuration::days(2);
    assert!(matches!(
        TokenService::verify_at(&forged, &test_secret(), later),
        Err(AuthError::InvalidSignature)
    ));
}

#[test]
fn test_swapped_signature_is_rejected() {
    let token = issue_sample();
    let mut other_claims = sample_claims();
    other_claims.insert("name".to_string(), json!("mallory"));
    let other =
        TokenService::issue_at(&other_claims, &test_secret(), ONE_HOUR, fixed_now()).unwrap();

    let (signing_input, _) = other.rsplit_once('.').unwrap();
    let (_, signature) = token.rsplit_once('.').unwrap();
    let forged = format!("{signing_input}.{signature}");

    assert!(matches!(
        TokenService::verify_at(&forged, &test_secret(), fixed_now()),
        Err(AuthError::InvalidSignature)
    ));
}

#[test]
fn test_structurally_broken_tokens_are_malformed() {
    for token in ["", ".", "..", "a.b", "a.b.c.d", "eyJ.eyJ.", ".eyJ.abc"] {
        assert!(
            matches!(
                TokenService::verify_at(token, &test_secret(), fixed_now()),
                Err(AuthError::Malformed(_))
            ),
            "{token:?} was not malformed"
        );
    }
}

#[test]
fn test_reserved_claim_collision() {
    let mut claims = sample_claims();
    claims.insert("exp".to_string(), json!(9_999_999_999_i64));

    assert!(matches!(
        TokenService::issue_at(&claims, &test_secret(), ONE_HOUR, fixed_now()),
        Err(AuthError::InvalidInput(_))
    ));
}

#[test]
fn test_empty_secret_rejected_on_both_sides() {
    let empty = SecretKey::from("");
    assert!(matches!(
        TokenService::issue_at(&sample_claims(), &empty, ONE_HOUR, fixed_now()),
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        TokenService::verify_at(&issue_sample(), &empty, fixed_now()),
        Err(AuthError::InvalidInput(_))
    ));
}

#[test]
fn test_wall_clock_service_round_trip() {
    let tokens = test_tokens();
    let token = tokens.issue(&sample_claims()).unwrap();
    let verified = tokens.verify(&token).unwrap();

    assert_eq!(verified.claims, sample_claims());
    assert_eq!(
        verified.expires_at - verified.issued_at,
        ChronoDuration::hours(1)
    );
}

#[test]
fn test_oversized_ttl_never_yields_an_unverifiable_token() {
    let huge = std::time::Duration::from_secs(10_000_000_000_000);
    assert!(matches!(
        TokenService::issue_with(&sample_claims(), &test_secret(), huge),
        Err(AuthError::InvalidInput(_))
    ));
    assert!(matches!(
        TokenService::new(test_secret(), huge),
        Err(AuthError::InvalidInput(_))
    ));

    let token = TokenService::issue_with(&sample_claims(), &test_secret(), MAX_TOKEN_TTL).unwrap();
    let verified = TokenService::verify_with(&token, &test_secret()).unwrap();
    assert_eq!(verified.claims, sample_claims());
}
