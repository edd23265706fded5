#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Local,
    Production,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Local => "local",
            Stage::Production => "production",
        }
    }
}

impl TryFrom<&str> for Stage {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Stage::Local),
            "production" => Ok(Stage::Production),
            other => Err(format!("unknown stage: {}", other)),
        }
    }
}
