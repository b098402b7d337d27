use rand::distributions::Uniform;
use rand::Rng;

pub const INVITE_CODE_LENGTH: usize = 8;
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random 8-character invite code drawn from `A-Z0-9`.
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let dist = Uniform::from(0..INVITE_ALPHABET.len());
    (0..INVITE_CODE_LENGTH)
        .map(|_| INVITE_ALPHABET[rng.sample(dist)] as char)
        .collect()
}

/// Codes are matched case-insensitively; surrounding whitespace is ignored.
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn is_well_formed_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LENGTH
        && code.bytes().all(|b| INVITE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_codes_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_invite_code(&mut rng);
            assert!(is_well_formed_invite_code(&code), "bad code {}", code);
        }
    }

    #[test]
    fn normalization_uppercases_and_trims() {
        assert_eq!(normalize_invite_code(" ab12cd34 "), "AB12CD34");
        assert!(is_well_formed_invite_code(&normalize_invite_code("ab12cd34")));
        assert!(!is_well_formed_invite_code("AB12CD3"));
        assert!(!is_well_formed_invite_code("AB12CD3!"));
    }
}
