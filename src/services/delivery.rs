use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery channel failed: {0}")]
    Channel(String),
}

/// Out-of-band delivery of a service OTP to the customer's phone
/// (SMS/WhatsApp-style gateway). Delivery failure never rolls back code
/// generation; the caller logs and moves on.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, phone: &str, code: &str) -> Result<(), DeliveryError>;
}

/// Development stand-in that writes the code to the log instead of sending.
pub struct LogDelivery;

#[async_trait]
impl OtpDelivery for LogDelivery {
    async fn deliver(&self, phone: &str, code: &str) -> Result<(), DeliveryError> {
        tracing::info!(phone = %phone, code = %code, "service otp delivery (log channel)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_channel_always_succeeds() {
        let channel = LogDelivery;
        channel.deliver("9876543210", "123456").await.unwrap();
    }
}
