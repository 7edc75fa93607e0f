use std::env;
use std::path::PathBuf;

pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub session_secret: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub admin_invite_code: Option<String>,
    pub users_path: PathBuf,
    pub products_path: PathBuf,
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        let session_secret = env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");

        let stripe_secret_key =
            env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");

        let stripe_webhook_secret =
            env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set");

        let admin_invite_code = env::var("ADMIN_INVITE_CODE").ok();

        let users_path = env::var("USERS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/users.json"));

        let products_path = env::var("PRODUCTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/products.json"));

        let public_dir = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        Config {
            port,
            base_url,
            session_secret,
            stripe_secret_key,
            stripe_webhook_secret,
            admin_invite_code,
            users_path,
            products_path,
            public_dir,
        }
    }
}
