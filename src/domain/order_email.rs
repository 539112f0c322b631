//! HTML rendering of an order notification.
//!
//! Rendering is pure: the only non-deterministic input, the moment the order
//! was received, is passed in by the caller.

use std::borrow::Cow;

use chrono::NaiveDateTime;

use super::order::{LineItem, OrderSubmission};

pub const ORDER_EMAIL_SUBJECT: &str = "Новый заказ из каталога сувениров";

const UNIT_LABEL: &str = "шт.";
const CURRENCY: &str = "₽";
const CELL_STYLE: &str = "padding: 10px; border-bottom: 1px solid #eee;";
const HEADER_STYLE: &str = "padding: 10px; border-bottom: 2px solid #ddd;";

/// Render the notification sent to the administrator.
///
/// Customer-supplied strings are interpolated verbatim unless `escape_html`
/// is set.
pub fn render_order_email(
    order: &OrderSubmission,
    received_at: &NaiveDateTime,
    escape_html: bool,
) -> String {
    let text = |value: &str| -> String {
        if escape_html {
            html_escape(value).into_owned()
        } else {
            value.to_string()
        }
    };

    let comment_line = if order.comment().is_empty() {
        String::new()
    } else {
        format!(
            "<p><strong>Комментарий:</strong> {}</p>",
            text(order.comment())
        )
    };

    let rows: String = order
        .items()
        .iter()
        .map(|item| render_item_row(item, &text))
        .collect();

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #0EA5E9; border-bottom: 2px solid #0EA5E9; padding-bottom: 10px;">{subject}</h2>
        <div style="margin: 20px 0;">
            <h3 style="color: #555;">Данные покупателя:</h3>
            <p><strong>Имя:</strong> {name}</p>
            <p><strong>Email:</strong> {email}</p>
            <p><strong>Телефон:</strong> {phone}</p>
            {comment_line}
        </div>
        <div style="margin: 20px 0;">
            <h3 style="color: #555;">Состав заказа:</h3>
            <table style="width: 100%; border-collapse: collapse;">
                <thead>
                    <tr style="background-color: #f8f9fa;">
                        <th style="{HEADER_STYLE} text-align: left;">Товар</th>
                        <th style="{HEADER_STYLE} text-align: center;">Кол-во</th>
                        <th style="{HEADER_STYLE} text-align: right;">Цена</th>
                        <th style="{HEADER_STYLE} text-align: right;">Сумма</th>
                    </tr>
                </thead>
                <tbody>
{rows}                </tbody>
            </table>
        </div>
        <div style="margin: 20px 0; padding: 15px; background-color: #f8f9fa; border-radius: 5px;">
            <h3 style="margin: 0; color: #0EA5E9;">Итого: {total} {CURRENCY}</h3>
        </div>
        <p style="color: #999; font-size: 12px; margin-top: 30px;">Заказ получен: {received}</p>
    </div>
</body>
</html>
"#,
        subject = ORDER_EMAIL_SUBJECT,
        name = text(order.customer_name()),
        email = text(order.customer_email()),
        phone = text(order.customer_phone()),
        total = order.total_amount().grouped(),
        received = received_at.format("%d.%m.%Y %H:%M"),
    )
}

fn render_item_row(item: &LineItem, text: &impl Fn(&str) -> String) -> String {
    format!(
        r#"                    <tr>
                        <td style="{CELL_STYLE}">{name}</td>
                        <td style="{CELL_STYLE} text-align: center;">{quantity} {UNIT_LABEL}</td>
                        <td style="{CELL_STYLE} text-align: right;">{price} {CURRENCY}</td>
                        <td style="{CELL_STYLE} text-align: right; font-weight: bold;">{total} {CURRENCY}</td>
                    </tr>
"#,
        name = text(&item.name),
        quantity = item.quantity,
        price = item.price.grouped(),
        total = item.total.grouped(),
    )
}

fn html_escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;"),
    )
}
