#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub supabase_storage: SupabaseStorage,
    pub mailer: Mailer,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    pub project_url: String,
    pub service_key: String,
    pub proof_bucket: String,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
}
