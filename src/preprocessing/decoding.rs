//! Декодирование источника с перебором кодировок

use std::borrow::Cow;

use encoding_rs::{Encoding, EUC_KR, UTF_8};

use crate::error::LoadError;

/// Порядок по умолчанию: строгий UTF-8, затем CP949 (EUC-KR в encoding_rs)
pub const DEFAULT_ENCODINGS: [&Encoding; 2] = [UTF_8, EUC_KR];

/// Результат успешного декодирования
#[derive(Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
}

/// Пробует кодировки по порядку; первая без ошибок побеждает.
/// BOM в начале данных ставит свою кодировку первой.
pub fn decode<'a>(
    bytes: &'a [u8],
    candidates: &[&'static Encoding],
) -> Result<Decoded<'a>, LoadError> {
    let mut order: Vec<&'static Encoding> = Vec::with_capacity(candidates.len() + 1);
    let mut body = bytes;

    if let Some((bom_encoding, bom_len)) = Encoding::for_bom(bytes) {
        order.push(bom_encoding);
        body = &bytes[bom_len..];
    }
    for &candidate in candidates {
        if !order.contains(&candidate) {
            order.push(candidate);
        }
    }

    for &encoding in &order {
        match encoding.decode_without_bom_handling_and_without_replacement(body) {
            Some(text) => {
                tracing::debug!("Decoded source as {}", encoding.name());
                return Ok(Decoded { text, encoding });
            }
            None => tracing::debug!("Source is not valid {}", encoding.name()),
        }
    }

    Err(LoadError::Undecodable {
        tried: order.iter().map(|e| e.name()).collect(),
    })
}
