use tfa_rs::{Clock, TOTP};

fn main() {
    let totp = TOTP::new("Github", 6, 30, "sha1").unwrap();
    let secret = totp.create_secret(160, true).unwrap();

    loop {
        let now = totp.clock().time().unwrap();
        println!(
            "code {}\t ttl {}\t valid until: {}",
            totp.get_code(&secret, now).unwrap(),
            totp.ttl(now),
            totp.next_step(now)
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
