use anyhow::Result;

use crate::config::{
    config_model::{Database, DotEnvyConfig, JwtSecret, Mailer, Server, SupabaseStorage},
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let supabase_storage = SupabaseStorage {
        project_url: std::env::var("SUPABASE_PROJECT_URL")
            .expect("SUPABASE_PROJECT_URL is invalid"),
        service_key: std::env::var("SUPABASE_SERVICE_KEY")
            .expect("SUPABASE_SERVICE_KEY is invalid"),
        proof_bucket: std::env::var("SUPABASE_PROOF_BUCKET")
            .unwrap_or_else(|_| "payment_proofs".to_string()),
    };

    let mailer = Mailer {
        api_url: std::env::var("MAILER_API_URL").expect("MAILER_API_URL is invalid"),
        api_key: std::env::var("MAILER_API_KEY").expect("MAILER_API_KEY is invalid"),
        from_address: std::env::var("MAILER_FROM_ADDRESS")
            .unwrap_or_else(|_| "orders@healthfit.example".to_string()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        supabase_storage,
        mailer,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(stage_str.as_str()).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    })
}
