// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io::{self, Write as _};

use base64::alphabet::Alphabet;
use base64::engine::{general_purpose, GeneralPurpose};
use base64::Engine as _;
use flate2::write::DeflateEncoder;
use flate2::Compression;

const PLANTUML_ALPHABET: Alphabet =
    match Alphabet::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("plantuml alphabet must be 64 unique ascii characters"),
    };

const PLANTUML_ENGINE: GeneralPurpose = GeneralPurpose::new(&PLANTUML_ALPHABET, general_purpose::PAD);

/// Encodes diagram source the way PlantUML servers expect it in a URL.
///
/// Line endings are normalized first so the same diagram keys identically on every
/// platform; the result doubles as the cache key.
pub fn encode_diagram(source: &str) -> io::Result<String> {
    let normalized = source.replace("\r\n", "\n");

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(normalized.as_bytes())?;
    let compressed = encoder.finish()?;

    Ok(PLANTUML_ENGINE.encode(compressed))
}

/// Wraps PNG bytes as an inline image.
pub fn image_markup(png: &[u8]) -> String {
    format!(
        "<img src=\"data:image/png;base64,{}\" alt=\"plantuml-diagram\">",
        general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use base64::Engine as _;
    use flate2::read::DeflateDecoder;

    use super::{encode_diagram, image_markup, PLANTUML_ENGINE};

    fn decode(payload: &str) -> String {
        let compressed = PLANTUML_ENGINE.decode(payload).expect("plantuml base64");
        let mut text = String::new();
        DeflateDecoder::new(compressed.as_slice()).read_to_string(&mut text).expect("inflate");
        text
    }

    #[test]
    fn payload_uses_plantuml_alphabet_and_inflates_back() {
        let source = "@startuml\nAlice -> Bob: hi\n@enduml\n";
        let payload = encode_diagram(source).expect("encode");
        assert!(payload
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '=')));
        assert_eq!(decode(&payload), source);
    }

    #[test]
    fn line_endings_do_not_change_the_key() {
        let unix = encode_diagram("@startuml\nA -> B\n@enduml").expect("encode");
        let windows = encode_diagram("@startuml\r\nA -> B\r\n@enduml").expect("encode");
        assert_eq!(unix, windows);
    }

    #[test]
    fn image_markup_inlines_png_bytes() {
        assert_eq!(
            image_markup(b"png"),
            "<img src=\"data:image/png;base64,cG5n\" alt=\"plantuml-diagram\">"
        );
    }
}
