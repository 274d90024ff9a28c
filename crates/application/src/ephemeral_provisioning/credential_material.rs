use rand::Rng;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

/// Length of generated passwords.
pub(crate) const PASSWORD_LENGTH: usize = 32;

const DIGITS: &[u8] = b"0123456789";
const SPECIALS: &[u8] = b"~=+%^*/()[]{}!@#$?|";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Synthesizes a unique, unpredictable username under `email_domain`.
#[must_use]
pub(crate) fn generate_username(email_domain: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("vault{suffix}@{email_domain}")
}

/// Generates a password satisfying common provider complexity rules.
///
/// The buffer starts with one digit and one special symbol, is filled from
/// the full alphabet and then shuffled, so both classes are always present
/// at unpredictable positions.
#[must_use]
pub(crate) fn generate_password() -> String {
    let alphabet: Vec<u8> = [LETTERS, DIGITS, SPECIALS].concat();
    let mut rng = OsRng;

    let mut buffer = Vec::with_capacity(PASSWORD_LENGTH);
    buffer.push(pick(&mut rng, DIGITS));
    buffer.push(pick(&mut rng, SPECIALS));
    while buffer.len() < PASSWORD_LENGTH {
        buffer.push(pick(&mut rng, alphabet.as_slice()));
    }
    buffer.shuffle(&mut rng);

    buffer.into_iter().map(char::from).collect()
}

fn pick(rng: &mut OsRng, characters: &[u8]) -> u8 {
    characters[rng.gen_range(0..characters.len())]
}
