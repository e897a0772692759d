//! Cart mutation and display commands.

use std::io::{BufRead, Write};

use chloes_boutique_core::{Cart, Money, ProductInput};
use chloes_boutique_storefront::error::{AppError, Result};
use chloes_boutique_storefront::ui::badge::badge_text;
use chloes_boutique_storefront::ui::cart_page::CartPage;

use super::Session;

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
    } else {
        for item in cart {
            println!(
                "{:<12} {:<24} {:>12} x {:<4} {:>12}",
                item.id.to_string(),
                item.name,
                item.price.to_string(),
                item.qty,
                item.line_total().to_string()
            );
        }
    }

    let totals = cart.totals();
    println!("Subtotal: {}", totals.subtotal);
    println!("Shipping: {}", totals.shipping);
    println!("Total:    {}", totals.total);
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the price cannot be read.
pub fn add(
    session: &Session,
    id: String,
    name: String,
    price: &str,
    image: Option<String>,
) -> Result<()> {
    let price = Money::parse(price)
        .map_err(|e| AppError::BadRequest(format!("invalid price '{price}': {e}")))?;
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("product id must not be empty".to_string()));
    }

    let mut product = ProductInput::new(id, name, price);
    if let Some(image) = image {
        product = product.with_image(image);
    }

    let cart = session.store.add(product);
    print_cart(&cart);
    Ok(())
}

/// Set a line's quantity from raw input text.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub fn set_qty(session: &Session, id: String, raw: &str) -> Result<()> {
    let page = CartPage::new(session.store.clone());
    let applied = page.change_quantity(id, raw);
    tracing::info!(qty = %applied, "quantity set");
    print_cart(&session.store.snapshot());
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub fn remove(session: &Session, id: String) -> Result<()> {
    let cart = session.store.remove(id);
    print_cart(&cart);
    Ok(())
}

/// Ask on the terminal. Anything but `y`/`yes` declines.
fn ask(prompt: &str) -> bool {
    let mut stderr = std::io::stderr();
    if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Empty the cart, asking first unless `yes` is set.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps, clippy::print_stdout)]
pub fn clear(session: &Session, yes: bool) -> Result<()> {
    let page = CartPage::new(session.store.clone());
    let cleared = if yes {
        page.clear(&|_: &str| true)
    } else {
        page.clear(&ask)
    };

    if cleared {
        println!("Cart cleared.");
    } else {
        println!("Cart left unchanged.");
    }
    Ok(())
}

/// Print items and totals.
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps)]
pub fn show(session: &Session) -> Result<()> {
    print_cart(&session.store.snapshot());
    Ok(())
}

/// Print the badge text (empty for an empty cart).
///
/// # Errors
///
/// Never fails; the signature matches the other commands.
#[allow(clippy::unnecessary_wraps, clippy::print_stdout)]
pub fn badge(session: &Session) -> Result<()> {
    println!("{}", badge_text(session.store.item_count()));
    Ok(())
}

/// Print the cart page HTML.
///
/// # Errors
///
/// Returns an error if the template fails to render.
#[allow(clippy::print_stdout)]
pub fn render(session: &Session) -> Result<()> {
    let page = CartPage::new(session.store.clone());
    println!("{}", page.render_current()?);
    Ok(())
}

