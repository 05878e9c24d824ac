//! Email background job.
//!
//! Booking confirmations are written to the job queue by the API and
//! delivered here, outside the request path. Without SMTP settings the
//! message is logged instead of sent.

use std::sync::Arc;

use apalis::prelude::Data;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

use crate::config::SmtpConfig;
use crate::domain::{Booking, Hotel, Room};
use crate::errors::{AppError, AppResult};

/// Email job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// HTML body
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Confirmation sent to the guest after a booking is stored.
    pub fn booking_confirmation(
        to: &str,
        guest_name: &str,
        booking: &Booking,
        room: &Room,
        hotel: &Hotel,
        currency: &str,
    ) -> Self {
        let body = format!(
            "<h2>Your Booking Details</h2>\
             <p>Dear {guest},</p>\
             <p>Thank you for your booking! Here are your details:</p>\
             <ul>\
             <li><strong>Booking ID:</strong> {id}</li>\
             <li><strong>Hotel Name:</strong> {hotel}</li>\
             <li><strong>Room Type:</strong> {room_type}</li>\
             <li><strong>Location:</strong> {address}</li>\
             <li><strong>Check-In:</strong> {check_in}</li>\
             <li><strong>Check-Out:</strong> {check_out}</li>\
             <li><strong>Guests:</strong> {guests}</li>\
             <li><strong>Total Amount:</strong> {currency}{total}</li>\
             </ul>\
             <p>We look forward to welcoming you!</p>\
             <p>If you need to make any changes, feel free to contact us.</p>",
            guest = escape_html(guest_name),
            id = booking.id,
            hotel = escape_html(&hotel.name),
            room_type = room.room_type,
            address = escape_html(&hotel.address),
            check_in = booking.check_in_date.format("%a %b %d %Y"),
            check_out = booking.check_out_date.format("%a %b %d %Y"),
            guests = booking.guests,
            currency = escape_html(currency),
            total = booking.total_price,
        );

        Self::new(to, "Hotel Booking Confirmation", body)
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// SMTP sender shared by every job the worker runs.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: String,
}

impl Mailer {
    /// Build the transport, or a logging-only mailer when SMTP is not configured.
    pub fn from_config(config: &SmtpConfig) -> AppResult<Self> {
        let transport = match config.host.as_deref() {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| AppError::internal(format!("invalid SMTP relay: {}", e)))?
                    .port(config.port);
                if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                Some(builder.build())
            }
            None => None,
        };

        Ok(Self {
            transport,
            sender: config.sender.clone(),
        })
    }

    pub async fn send(&self, job: &EmailJob) -> AppResult<()> {
        let Some(transport) = &self.transport else {
            tracing::warn!("SMTP not configured - logging email instead of sending");
            tracing::info!(
                "=== EMAIL (not sent) ===\n\
                 From: {}\n\
                 To: {}\n\
                 Subject: {}\n\
                 Body:\n{}\n\
                 ========================",
                self.sender,
                job.to,
                job.subject,
                job.body
            );
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|e| AppError::internal(format!("invalid sender address: {}", e)))?,
            )
            .to(job
                .to
                .parse()
                .map_err(|e| AppError::validation(format!("invalid recipient address: {}", e)))?)
            .subject(job.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(job.body.clone())
            .map_err(|e| AppError::internal(format!("failed to build email: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::external(format!("SMTP delivery failed: {}", e)))?;

        Ok(())
    }
}

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob, mailer: Data<Arc<Mailer>>) -> Result<(), AppError> {
    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    mailer.send(&job).await.map_err(|e| {
        tracing::warn!(to = %job.to, error = %e, "Email delivery attempt failed");
        e
    })?;

    tracing::info!(to = %job.to, "Email processed successfully");
    Ok(())
}
