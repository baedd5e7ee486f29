//! Formatting helpers shared by logging and the CLI.

/// Number of decimal places of the native token.
pub const NATIVE_TOKEN_DECIMALS: u32 = 6;

/// Render a raw token amount with the given number of decimal places.
pub fn format_token_amount(amount: u128, decimals: u32) -> String {
	format!(
		"{:.*}",
		decimals as usize,
		amount as f64 / 10f64.powi(decimals as i32)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_with_native_decimals() {
		assert_eq!(format_token_amount(31_337_000_000, NATIVE_TOKEN_DECIMALS), "31337.000000");
		assert_eq!(format_token_amount(0, NATIVE_TOKEN_DECIMALS), "0.000000");
		assert_eq!(format_token_amount(1, 0), "1");
	}
}
