// src/mail/templates.rs

use uuid::Uuid;

use crate::mail::OutgoingMail;
use crate::models::{
    auth::RESET_TOKEN_TTL_MINUTES,
    catalog::ServicePackView,
    order::{OrderStatus, OrderView},
};

const BRAND: &str = "AtlasTech Solutions";

const STYLE: &str = "body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { text-align: center; margin-bottom: 24px; }
        .card { background: #f9fafb; border-radius: 12px; padding: 24px; margin: 16px 0; }
        .status { display: inline-block; padding: 4px 12px; border-radius: 9999px; font-size: 12px; font-weight: 600; }
        .status-pending { background: #fef3c7; color: #92400e; }
        .status-completed { background: #d1fae5; color: #065f46; }
        .status-cancelled { background: #fee2e2; color: #991b1b; }
        .footer { margin-top: 32px; font-size: 12px; color: #6b7280; text-align: center; }";

pub fn order_confirmation(order: &OrderView) -> OutgoingMail {
    let o = &order.order;
    let notes = o
        .notes
        .as_deref()
        .map(|n| format!(r#"<p style="margin: 12px 0 0;"><strong>Notes:</strong> {}</p>"#, escape_html(n)))
        .unwrap_or_default();

    let card = format!(
        r#"<p style="margin: 0 0 8px;"><strong>Order #{reference}</strong></p>
        <span class="status status-{status}">{label}</span>
        <p style="margin: 16px 0 0;">
            <strong>Service Pack:</strong> {pack}<br>
            <strong>Price:</strong> {price} DH
        </p>
        {notes}"#,
        reference = order_reference(o.id),
        status = o.status.as_str(),
        label = o.status.label(),
        pack = pack_name(order.service_pack.as_ref()),
        price = order
            .service_pack
            .as_ref()
            .map(|p| p.price.as_str())
            .unwrap_or("0.00"),
        notes = notes,
    );

    OutgoingMail {
        to: o.email.clone(),
        subject: format!("Order Confirmation - {}", BRAND),
        html: layout(
            "Order Confirmation",
            &o.customer_name,
            "Thank you for your order! We've received your request and will contact you shortly.",
            &card,
            "Our team will reach out within 24 hours to discuss your project.",
        ),
    }
}

pub fn order_status_updated(order: &OrderView, old_status: OrderStatus) -> OutgoingMail {
    let o = &order.order;

    let card = format!(
        r#"<p style="margin: 0 0 8px;"><strong>Order #{reference}</strong></p>
        <p style="margin: 0 0 4px; font-size: 14px; color: #6b7280;">{old} &rarr; <strong>{new}</strong></p>
        <span class="status status-{status}">{new}</span>
        <p style="margin: 16px 0 0;">
            <strong>Service Pack:</strong> {pack}
        </p>"#,
        reference = order_reference(o.id),
        old = old_status.label(),
        new = o.status.label(),
        status = o.status.as_str(),
        pack = pack_name(order.service_pack.as_ref()),
    );

    let closing = match o.status {
        OrderStatus::Completed => "Your project has been completed. Thank you for choosing AtlasTech!",
        OrderStatus::Cancelled => "If you have any questions, please contact us.",
        OrderStatus::Pending => "We'll keep you updated on the progress.",
    };

    OutgoingMail {
        to: o.email.clone(),
        subject: format!("Order Status Update - {}", BRAND),
        html: layout(
            "Order Status Update",
            &o.customer_name,
            "Your order status has been updated.",
            &card,
            closing,
        ),
    }
}

/// Link to the storefront's reset page carrying the token and the email.
pub fn password_reset_url(frontend_url: &str, token: &str, email: &str) -> String {
    format!(
        "{}/reset-password?token={}&email={}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(token),
        urlencoding::encode(email),
    )
}

pub fn password_reset(to: &str, name: &str, url: &str) -> OutgoingMail {
    let card = format!(
        r#"<p style="margin: 0 0 16px;">You are receiving this email because we received a password reset request for your account.</p>
        <p style="text-align: center; margin: 0;">
            <a href="{url}" style="display: inline-block; background: #2563eb; color: #fff; padding: 12px 24px; border-radius: 8px; text-decoration: none; font-weight: 600;">Reset Password</a>
        </p>
        <p style="margin: 16px 0 0; font-size: 14px; color: #6b7280;">This link will expire in {ttl} minutes.</p>"#,
        url = escape_html(url),
        ttl = RESET_TOKEN_TTL_MINUTES,
    );

    OutgoingMail {
        to: to.to_string(),
        subject: "Reset Your Password".to_string(),
        html: layout(
            "Password Reset",
            name,
            "We received a request to reset your password.",
            &card,
            "If you did not request a password reset, no further action is required.",
        ),
    }
}

/// Short, human friendly order number.
pub fn order_reference(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

fn pack_name(pack: Option<&ServicePackView>) -> String {
    pack.map(|p| escape_html(&p.name)).unwrap_or_else(|| "N/A".to_string())
}

fn layout(title: &str, customer_name: &str, intro: &str, card: &str, closing: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        {style}
    </style>
</head>
<body>
    <div class="header">
        <h1 style="margin: 0; font-size: 24px;">{brand}</h1>
        <p style="margin: 8px 0 0; color: #6b7280;">{title}</p>
    </div>
    <p>Hi {name},</p>
    <p>{intro}</p>
    <div class="card">
        {card}
    </div>
    <p>{closing}</p>
    <div class="footer">
        <p>{brand} &ndash; Web Development for SMEs</p>
    </div>
</body>
</html>
"#,
        title = title,
        style = STYLE,
        brand = BRAND,
        name = escape_html(customer_name),
        intro = intro,
        card = card,
        closing = closing,
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::order::Order;

    fn view(status: OrderStatus, with_pack: bool) -> OrderView {
        let now = Utc::now();
        OrderView {
            order: Order {
                id: Uuid::new_v4(),
                user_id: None,
                customer_name: "Nadia <script>".into(),
                email: "nadia@example.com".into(),
                phone: None,
                selected_pack_id: None,
                crm_lead_id: None,
                status,
                notes: Some("Call after 5 & before 7".into()),
                created_at: now,
                updated_at: now,
            },
            service_pack: with_pack.then(|| ServicePackView {
                id: Uuid::new_v4(),
                name: "Basic".into(),
                description: None,
                price: "499.00".into(),
                features: vec!["A".into()],
                is_active: true,
                created_at: now,
            }),
        }
    }

    #[test]
    fn confirmation_mentions_pack_price_and_notes() {
        let mail = order_confirmation(&view(OrderStatus::Pending, true));
        assert_eq!(mail.to, "nadia@example.com");
        assert!(mail.html.contains("<strong>Service Pack:</strong> Basic"));
        assert!(mail.html.contains("499.00 DH"));
        assert!(mail.html.contains("Call after 5 &amp; before 7"));
    }

    #[test]
    fn customer_text_is_escaped() {
        let mail = order_confirmation(&view(OrderStatus::Pending, true));
        assert!(mail.html.contains("Hi Nadia &lt;script&gt;,"));
        assert!(!mail.html.contains("<script>"));
    }

    #[test]
    fn status_update_shows_transition_and_closing_line() {
        let mail = order_status_updated(&view(OrderStatus::Completed, true), OrderStatus::Pending);
        assert_eq!(mail.subject, "Order Status Update - AtlasTech Solutions");
        assert!(mail.html.contains("Pending &rarr; <strong>Completed</strong>"));
        assert!(mail.html.contains("Your project has been completed."));
    }

    #[test]
    fn deleted_pack_renders_as_not_available() {
        let mail = order_status_updated(&view(OrderStatus::Cancelled, false), OrderStatus::Completed);
        assert!(mail.html.contains("<strong>Service Pack:</strong> N/A"));
    }

    #[test]
    fn reference_is_eight_uppercase_hex_chars() {
        let reference = order_reference(Uuid::new_v4());
        assert_eq!(reference.len(), 8);
        assert!(reference.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn reset_link_encodes_the_email() {
        let url = password_reset_url("http://localhost:5173/", "abc123", "sara+shop@example.com");
        assert_eq!(
            url,
            "http://localhost:5173/reset-password?token=abc123&email=sara%2Bshop%40example.com"
        );
    }

    #[test]
    fn reset_mail_carries_the_escaped_link_and_expiry() {
        let url = password_reset_url("https://atlastech.com", "tok", "a@b.ma");
        let mail = password_reset("a@b.ma", "Sara <b>", &url);
        assert_eq!(mail.subject, "Reset Your Password");
        assert!(mail.html.contains("https://atlastech.com/reset-password?token=tok&amp;email=a%40b.ma"));
        assert!(mail.html.contains("expire in 60 minutes"));
        assert!(mail.html.contains("Hi Sara &lt;b&gt;"));
    }
}
