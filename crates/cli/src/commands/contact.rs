//! Contact form command.

use chloes_boutique_storefront::error::Result;
use chloes_boutique_storefront::ui::contact::ContactForm;

/// Validate the contact form and print the confirmation.
///
/// # Errors
///
/// Returns an error naming the first invalid field.
#[allow(clippy::print_stdout)]
pub fn send(name: String, email: String, message: String) -> Result<()> {
    let form = ContactForm::new(name, email, message);
    let confirmation = form.submit()?;
    println!("{confirmation}");
    Ok(())
}
