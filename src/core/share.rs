//! Fabricated share links.
//!
//! Links are cosmetic: nothing resolves them.

use rand::Rng;

/// Host used when none is configured.
pub const DEFAULT_SHARE_HOST: &str = "apponthego.io";

/// Length of the random link suffix.
pub const SHARE_ID_LEN: usize = 6;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Builds `https://<host>/d/<id>` with a random lowercase base36 id.
///
/// A scheme or trailing slash on `host` is stripped.
#[must_use]
pub fn share_link<R: Rng + ?Sized>(host: &str, rng: &mut R) -> String {
    let host = host
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let host = if host.is_empty() {
        DEFAULT_SHARE_HOST
    } else {
        host
    };

    let id: String = (0..SHARE_ID_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();

    format!("https://{host}/d/{id}")
}

/// Text shown in place of a QR code for `link`.
#[must_use]
pub fn qr_placeholder(link: &str) -> Vec<String> {
    const SIDE: usize = 9;
    let border = format!("+{}+", "-".repeat(SIDE * 2));
    let blank = format!("|{}|", " ".repeat(SIDE * 2));
    let label = format!("|{:^width$}|", "QR", width = SIDE * 2);

    let mut lines = vec![border.clone(), blank.clone(), label, blank, border];
    lines.push(format!("Scan to install: {link}"));
    lines
}
