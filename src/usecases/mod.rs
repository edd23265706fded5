pub mod orders;
pub mod payment_proofs;
pub mod subscription_confirmation;
pub mod subscription_period;
