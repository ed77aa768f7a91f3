#[cfg(feature = "otpauth")]
use tfa_rs::TOTP;

#[cfg(feature = "otpauth")]
fn main() {
    let (totp, uri) = TOTP::from_uri(
        "otpauth://totp/Github%3Aconstantoine?secret=K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN&issuer=Github&period=30&algorithm=SHA1&digits=6",
    )
    .unwrap();

    println!(
        "{} ({}) code: {}",
        uri.label,
        totp,
        totp.get_code_current(&uri.secret).unwrap()
    );
}

#[cfg(not(feature = "otpauth"))]
fn main() {}
