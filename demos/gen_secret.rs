use tfa_rs::{entropy::OsEntropy, Secret, TOTP, DEFAULT_SECRET_BITS};

fn main() {
    let totp = TOTP::new("Github", 6, 30, "sha1").unwrap();

    let secret = totp.create_secret(DEFAULT_SECRET_BITS, true).unwrap();
    println!(
        "secret base32: {} ; code: {}",
        secret,
        totp.get_code_current(&secret).unwrap()
    );

    let raw = Secret::generate_secret(&OsEntropy).unwrap();
    let encoded = raw.to_encoded().to_string();
    println!(
        "secret raw: {} ; secret base32 {} ; code: {}",
        raw,
        encoded,
        totp.get_code_current(&encoded).unwrap()
    );
    println!("{}", totp.get_qr_text("Github:constantoine@github.com", &encoded));
}
