use super::open_store;
use crate::error::{PurseError, Result};
use crate::settings::load_settings;
use crate::store::Store;

/// Print what autocompletion would add after `prefix`. Prints nothing when
/// there is no match.
pub fn run(prefix: &str, account: Option<&str>) -> Result<()> {
    let store = open_store(&load_settings())?;
    let account = match account {
        Some(name) => store.find_account(name)?,
        None => store.current_account()?.ok_or_else(|| {
            PurseError::Other("No account selected. Pass --account or run `purse accounts select`.".into())
        })?,
    };
    let suffix = store.autocomplete_category(&account, prefix)?;
    if !suffix.is_empty() {
        println!("{suffix}");
    }
    Ok(())
}
