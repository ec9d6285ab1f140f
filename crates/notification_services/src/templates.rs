use crate::types::{
    ApprovalEmailData, EmailMessage, RejectionEmailData, ReviewVerificationData,
    SubmissionNotificationData,
};

const HEADER_STYLE: &str = "background: linear-gradient(135deg, #FB923C 0%, #C2410C 100%); color: white; padding: 30px; border-radius: 8px 8px 0 0; text-align: center;";
const CARD_STYLE: &str = "background: white; padding: 30px; border: 1px solid #e2e8f0; border-top: none; border-radius: 0 0 8px 8px;";
const FOOTER: &str = r#"
          <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e2e8f0; text-align: center;">
            <p style="font-size: 14px; color: #64748b; margin: 0;">
              Basketball Camps Platform<br>
              Building the future of basketball training
            </p>
          </div>"#;

/// Escapes text interpolated into HTML bodies.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(width: u32, title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
      <html>
      <head>
        <meta charset="utf-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
      </head>
      <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #1e293b; max-width: {width}px; margin: 0 auto; padding: 20px;">
        <div style="{HEADER_STYLE}">
          <h1 style="margin: 0; font-size: 28px;">{title}</h1>
        </div>
        <div style="{CARD_STYLE}">
{content}
{FOOTER}
        </div>
      </body>
      </html>"#
    )
}

/// Approval notice sent to the camp email.
pub fn camp_approval(data: &ApprovalEmailData) -> EmailMessage {
    let content = format!(
        r#"          <p style="font-size: 16px; margin: 0 0 20px 0;">Hello {owner},</p>
          <p style="font-size: 16px; margin: 0 0 20px 0;">
            Great news! Your basketball camp <strong style="color: #C2410C;">"{camp}"</strong> has been approved and is now live on our platform.
          </p>
          <div style="background: #FEF7EE; padding: 20px; border-radius: 8px; border-left: 4px solid #FB923C; margin: 20px 0;">
            <p style="margin: 0; font-size: 16px; color: #C2410C; font-weight: bold;">What's Next?</p>
            <ul style="margin: 10px 0 0 0; padding-left: 20px; color: #292524;">
              <li style="margin-bottom: 8px;">Your camp is now visible to all users browsing our platform</li>
              <li style="margin-bottom: 8px;">Parents and players can book spots directly</li>
              <li style="margin-bottom: 8px;">You can manage your camp details from your dashboard</li>
            </ul>
          </div>"#,
        owner = escape_html(&data.owner_name),
        camp = escape_html(&data.camp_name),
    );

    EmailMessage {
        to: data.camp_email.clone(),
        subject: format!("Congratulations! {} is Now Live", data.camp_name),
        html: layout(600, "🎉 Your Camp Has Been Approved!", &content),
    }
}

/// Rejection notice carrying the moderator's reason.
pub fn camp_rejection(data: &RejectionEmailData) -> EmailMessage {
    let content = format!(
        r#"          <p style="font-size: 16px; margin: 0 0 20px 0;">Hello {owner},</p>
          <p style="font-size: 16px; margin: 0 0 20px 0;">
            Thank you for submitting <strong style="color: #C2410C;">"{camp}"</strong>. After reviewing your submission we are unable to publish it at this time.
          </p>
          <div style="background: #FEF7EE; padding: 20px; border-radius: 8px; border-left: 4px solid #FB923C; margin: 20px 0;">
            <p style="margin: 0 0 10px 0; font-size: 16px; color: #C2410C; font-weight: bold;">Reason for Rejection:</p>
            <p style="margin: 0; font-size: 15px; color: #292524; white-space: pre-wrap;">{reason}</p>
          </div>
          <p style="font-size: 16px; margin: 20px 0;">
            You are welcome to address the points above and submit your camp again.
          </p>"#,
        owner = escape_html(&data.owner_name),
        camp = escape_html(&data.camp_name),
        reason = escape_html(&data.rejection_reason),
    );

    EmailMessage {
        to: data.camp_email.clone(),
        subject: format!("Update on {} Submission", data.camp_name),
        html: layout(600, "Camp Submission Update", &content),
    }
}

/// Verification link for a freshly written review.
pub fn review_verification(data: &ReviewVerificationData) -> EmailMessage {
    let url = escape_html(&data.verification_url);
    let content = format!(
        r#"          <h2>Verify Your Review</h2>
          <p>Thank you for attending our basketball camp! Please verify your review to publish it.</p>
          <p><a href="{url}">Click here to verify your review</a></p>
          <p>Or paste this link in your browser: {url}</p>"#
    );

    EmailMessage {
        to: data.participant_email.clone(),
        subject: "Verify Your Basketball Camp Review".to_string(),
        html: layout(600, "🏀 One Last Step", &content),
    }
}

/// Admin alert describing a new submission awaiting moderation.
pub fn submission_notification(admin_email: &str, data: &SubmissionNotificationData) -> EmailMessage {
    let dates_html: String = data
        .camp_dates
        .iter()
        .map(|date| {
            format!(
                r#"
              <tr>
                <td style="padding: 8px; border: 1px solid #e2e8f0;">{}</td>
                <td style="padding: 8px; border: 1px solid #e2e8f0;">{}</td>
                <td style="padding: 8px; border: 1px solid #e2e8f0;">{} days</td>
                <td style="padding: 8px; border: 1px solid #e2e8f0;">€{}</td>
              </tr>"#,
                escape_html(&date.start_date),
                escape_html(&date.end_date),
                date.days,
                escape_html(&date.price),
            )
        })
        .collect();

    let images_html: String = data
        .image_urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let is_profile = data.profile_image_url.as_deref() == Some(url.as_str());
            let border = if is_profile {
                "3px solid #FB923C"
            } else {
                "1px solid #e2e8f0"
            };
            let label = if is_profile {
                r#"<p style="text-align: center; font-size: 12px; color: #FB923C; font-weight: bold;">Profile Photo</p>"#
            } else {
                ""
            };
            format!(
                r#"
              <div style="display: inline-block; margin: 10px;">
                <img src="{}" alt="Camp image {}" style="max-width: 200px; border-radius: 8px; border: {};" />
                {}
              </div>"#,
                escape_html(url),
                index + 1,
                border,
                label,
            )
        })
        .collect();

    let content = format!(
        r#"          <h2 style="color: #C2410C; border-bottom: 2px solid #FB923C; padding-bottom: 10px;">{camp}</h2>
          <h3>Owner</h3>
          <p>{owner_name}<br>{owner_email}<br>{owner_phone}</p>
          <h3>Camp</h3>
          <p>
            <strong>Email:</strong> {camp_email}<br>
            <strong>Location:</strong> {location}, {country}<br>
            <strong>Ages:</strong> {age_min} - {age_max}<br>
            <strong>Gender:</strong> {gender}<br>
            <strong>Capacity:</strong> {capacity}
          </p>
          <p style="white-space: pre-wrap;">{description}</p>
          <h3>Dates &amp; Prices</h3>
          <table style="border-collapse: collapse; width: 100%;">
            <tr>
              <th style="padding: 8px; border: 1px solid #e2e8f0;">Start</th>
              <th style="padding: 8px; border: 1px solid #e2e8f0;">End</th>
              <th style="padding: 8px; border: 1px solid #e2e8f0;">Duration</th>
              <th style="padding: 8px; border: 1px solid #e2e8f0;">Price</th>
            </tr>{dates_html}
          </table>
          <h3>Images ({image_count})</h3>
          <div>{images_html}</div>"#,
        camp = escape_html(&data.camp_name),
        owner_name = escape_html(&data.owner_name),
        owner_email = escape_html(&data.owner_email),
        owner_phone = escape_html(&data.owner_phone),
        camp_email = escape_html(&data.camp_email),
        location = escape_html(&data.location),
        country = escape_html(&data.country),
        age_min = data.age_min,
        age_max = data.age_max,
        gender = escape_html(&data.gender),
        capacity = data.capacity,
        description = escape_html(&data.description),
        image_count = data.image_urls.len(),
    );

    EmailMessage {
        to: admin_email.to_string(),
        subject: format!("New Camp Submission: {}", data.camp_name),
        html: layout(800, "🏀 New Camp Submission", &content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionDateSummary;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Hoops" & 'Dunks'</b>"#),
            "&lt;b&gt;&quot;Hoops&quot; &amp; &#39;Dunks&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_rejection_email_contains_escaped_reason() {
        let message = camp_rejection(&RejectionEmailData {
            camp_name: "Summer Hoops".to_string(),
            camp_email: "camp@example.com".to_string(),
            owner_name: "Marko".to_string(),
            rejection_reason: "Images <missing>".to_string(),
        });

        assert_eq!(message.to, "camp@example.com");
        assert_eq!(message.subject, "Update on Summer Hoops Submission");
        assert!(message.html.contains("Images &lt;missing&gt;"));
        assert!(message.html.contains("Hello Marko"));
    }

    #[test]
    fn test_approval_subject() {
        let message = camp_approval(&ApprovalEmailData {
            camp_name: "Summer Hoops".to_string(),
            camp_email: "camp@example.com".to_string(),
            owner_name: "Marko".to_string(),
        });
        assert_eq!(message.subject, "Congratulations! Summer Hoops is Now Live");
    }

    #[test]
    fn test_submission_notification_marks_profile_image() {
        let data = SubmissionNotificationData {
            camp_name: "Summer Hoops".to_string(),
            owner_name: "Marko".to_string(),
            owner_email: "marko@example.com".to_string(),
            owner_phone: "+381 64 123 4567".to_string(),
            camp_email: "camp@example.com".to_string(),
            location: "Belgrade".to_string(),
            country: "Serbia".to_string(),
            description: "Daily drills".to_string(),
            age_min: 10,
            age_max: 16,
            gender: "both".to_string(),
            capacity: 30,
            camp_dates: vec![SubmissionDateSummary {
                start_date: "2025-07-01".to_string(),
                end_date: "2025-07-07".to_string(),
                price: "450.00".to_string(),
                days: 7,
            }],
            image_urls: vec!["https://cdn/a.jpg".to_string(), "https://cdn/b.jpg".to_string()],
            profile_image_url: Some("https://cdn/b.jpg".to_string()),
        };

        let message = submission_notification("admin@example.com", &data);
        assert_eq!(message.to, "admin@example.com");
        assert_eq!(message.html.matches("Profile Photo").count(), 1);
        assert!(message.html.contains("7 days"));
        assert!(message.html.contains("€450.00"));
    }
}
