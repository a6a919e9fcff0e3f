fn main() {
  println!("cargo::rerun-if-changed=.env");
  println!("cargo::rerun-if-env-changed=FINTRA_API_URL");

  // a missing .env is fine, the app then talks to its own origin
  let _ = dotenvy::dotenv();

  if let Ok(url) = std::env::var("FINTRA_API_URL") {
    println!("cargo::rustc-env=FINTRA_API_URL={}", url);
  }
}
