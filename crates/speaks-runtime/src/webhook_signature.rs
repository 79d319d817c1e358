use anyhow::{anyhow, bail, Context, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Verifies the `X-Hub-Signature-256` header against the raw request body.
///
/// A missing secret disables verification entirely, for local runs against
/// replayed payloads. With a secret configured, a missing or malformed
/// header is a hard failure.
pub fn verify_webhook_signature(
    secret: Option<&str>,
    signature_header: Option<&str>,
    payload: &[u8],
) -> Result<()> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let Some(header) = signature_header else {
        bail!("missing webhook signature header");
    };
    let digest_hex = header
        .strip_prefix("sha256=")
        .ok_or_else(|| anyhow!("webhook signature must use sha256=<hex> format"))?;
    let signature_bytes = hex::decode(digest_hex).context("webhook signature is not valid hex")?;
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("failed to initialize webhook signature verifier")?;
    mac.update(payload);
    mac.verify_slice(&signature_bytes)
        .map_err(|_| anyhow!("webhook signature verification failed"))
}
