use proc_macro::TokenStream;

mod controller;

/// Attribute macro that turns an impl block into a controller
///
/// Every public method shaped like `fn name(&self, ctx: Context) -> Result<(), E>`
/// (or `&Context`, or `HandlerResult`, sync or async) becomes an action;
/// private methods and other shapes are left alone. A public sibling
/// `fn name_params(&self) -> &str`
/// adds a third path segment to that action's route.
///
/// # Example
/// ```ignore
/// use trellis::{controller, Context, HandlerResult};
///
/// pub struct UserAccount;
///
/// #[controller]
/// impl UserAccount {
///     // ANY /user_account/show/:id
///     pub async fn show(&self, ctx: Context) -> HandlerResult {
///         Ok(())
///     }
///
///     pub fn show_params(&self) -> &'static str {
///         ":id"
///     }
/// }
///
/// // ANY /accounts/list
/// #[controller(name = "Accounts")]
/// impl Other {
///     pub fn list(&self, ctx: &Context) -> HandlerResult { Ok(()) }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}
