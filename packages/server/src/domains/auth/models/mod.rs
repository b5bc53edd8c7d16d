pub mod pending_registration;

pub use pending_registration::{
    PendingRegistration, RegistrationPayload, CODE_TTL_MINUTES, RESEND_COOLDOWN_SECONDS,
};
