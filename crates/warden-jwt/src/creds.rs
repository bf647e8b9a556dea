//! User credentials documents (`.creds` files).

/// Render the standard NATS credentials document for a user.
pub fn format_user_creds(jwt: &str, seed: &str) -> String {
    format!(
        "-----BEGIN NATS USER JWT-----\n\
         {jwt}\n\
         ------END NATS USER JWT------\n\
         \n\
         ************************* IMPORTANT *************************\n\
         NKEY Seed printed below can be used to sign and prove identity.\n\
         NKEYs are sensitive and should be treated as secrets.\n\
         \n\
         -----BEGIN USER NKEY SEED-----\n\
         {seed}\n\
         ------END USER NKEY SEED------\n\
         \n\
         *************************************************************\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creds_layout() {
        let creds = format_user_creds("eyJ.jwt.sig", "SUSEED");
        let lines: Vec<&str> = creds.lines().collect();

        assert_eq!(lines[0], "-----BEGIN NATS USER JWT-----");
        assert_eq!(lines[1], "eyJ.jwt.sig");
        assert_eq!(lines[2], "------END NATS USER JWT------");
        assert!(lines.contains(&"SUSEED"));
        assert!(creds.ends_with("*************************************************************\n"));
    }
}
