//! Image format negotiation from the `Accept` header

/// Image subtypes from an `Accept` header, most preferred first.
///
/// Only `image/<subtype>` media ranges count; `image/*`, other top-level
/// types and `q=0` entries are skipped. Equal weights keep header order.
pub fn preferred_image_types(accept: &str) -> Vec<String> {
    let mut weighted: Vec<(f32, String)> = Vec::new();

    for media_range in accept.split(',') {
        let mut params = media_range.split(';');
        let media_type = params.next().unwrap_or("").trim().to_ascii_lowercase();

        let Some(subtype) = media_type.strip_prefix("image/") else {
            continue;
        };
        if subtype.is_empty() || subtype == "*" {
            continue;
        }

        let mut quality = 1.0f32;
        for param in params {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse().unwrap_or(0.0);
                }
            }
        }
        if quality <= 0.0 {
            continue;
        }

        if !weighted.iter().any(|(_, s)| s == subtype) {
            weighted.push((quality, subtype.to_string()));
        }
    }

    // Stable sort keeps header order for equal weights
    weighted.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    weighted.into_iter().map(|(_, subtype)| subtype).collect()
}
