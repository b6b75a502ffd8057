/// Notification texts for account and review lifecycle events
///
/// The service runs for a Czech audience, so all transactional mail is in
/// Czech. Each function returns `(subject, body)`; bodies are plain text.

/// Welcome mail after registration
pub fn welcome() -> (String, String) {
    (
        "Vítejte na stránkách 'Recenze společností'!".to_string(),
        "Právě jste se zaregistrovali na stránku recenze-společností.cz! \
         Jsme rádi, že Vás tu máme."
            .to_string(),
    )
}

/// Confirmation of a newly submitted review
pub fn review_submitted(company_name: &str, body: &str, rating: i32) -> (String, String) {
    (
        "Právě jste přidali recenzi na stránce 'Recenze společností'!".to_string(),
        format!(
            "Vaše recenze na firmu {} byla úspěšně vložena. Text vaší recenze: {}. \
             Vaše hodnocení této firmy je {} z 5ti. O schválení vaší recenze Vás \
             budeme informovat emailem.",
            company_name, body, rating
        ),
    )
}

/// Confirmation of an edited review
pub fn review_edited(company_name: &str, body: &str, rating: i32) -> (String, String) {
    (
        "Na stránkách recenze-společností jste upravili jedno z Vašich hodnocení".to_string(),
        format!(
            "Právě jste upravili své hodnocení společnosti {}. Text vašeho nového \
             hodnocení: {}. Vaše nové hodnocení společnosti: {} z 5ti.",
            company_name, body, rating
        ),
    )
}

/// Notice that a withdrawn review stays on the site anonymized
pub fn review_withdrawn(company_name: &str) -> (String, String) {
    (
        "Na stránkách recenze-společností jste smazali jedno z Vašich hodnocení".to_string(),
        format!(
            "Právě jste smazali své hodnocení společnosti {}. Text vašeho hodnocení \
             zůstane na stránce recenze-společností. Jakákoli jeho spojitost s vaší \
             osobou bude smazána.",
            company_name
        ),
    )
}

/// Approval notice from the moderation queue
pub fn review_approved() -> (String, String) {
    (
        "Vaše recenze na stránkách Recenze-společností byla schválena".to_string(),
        "Vámi přidaná recenze na stránkách Recenze-společností byla právě schválena \
         administrátorem a byla přidána mezi ostatní recenze. Tým Recenze-společností."
            .to_string(),
    )
}

/// Rejection notice, citing the content policy
pub fn review_rejected(terms_url: &str) -> (String, String) {
    (
        "Vaše recenze na stránkách Recenze-společností byla zamítnuta".to_string(),
        format!(
            "Vámi přidaná recenze na stránkách Recenze-společností byla administrátorem \
             zamítnuta. Vaše recenze bohužel není v souladu s našimi uživatelskými \
             podmínkami. Podmínky můžete nalézt na adrese: {}. Tým Recenze-společností.",
            terms_url
        ),
    )
}

/// Notice that an already published review was retracted by an administrator
pub fn review_retracted(terms_url: &str) -> (String, String) {
    (
        "Vaše recenze na stránkách Recenze-společností byla smazána".to_string(),
        format!(
            "Vámi přidaná recenze na stránkách Recenze-společností byla administrátorem \
             smazána. Vaše recenze bohužel není v souladu s našimi uživatelskými \
             podmínkami. Podmínky můžete nalézt na adrese: {}. Tým Recenze-společností.",
            terms_url
        ),
    )
}

/// Email-change confirmation, sent to both the old and new address
pub fn email_changed(old_email: &str, new_email: &str) -> (String, String) {
    (
        "Na stránkách recenze-společností jste změnili svoji emailovou adresu".to_string(),
        format!(
            "Právě jste změnili svou emailovou adresu na stránce recenze-společností. \
             Vaše původní adresa: {}, vaše nová adresa: {}.",
            old_email, new_email
        ),
    )
}

/// Password-change confirmation
pub fn password_changed() -> (String, String) {
    (
        "Na stránkách recenze-společností jste změnili své heslo".to_string(),
        "Právě jste změnili svoje přístupové heslo na stránce recenze-společností."
            .to_string(),
    )
}

/// Confirmation of a data-copy request, sent to the requesting user
pub fn data_request_confirmation() -> (String, String) {
    (
        "Na stránkách recenze-společností jste zažádal/a o kopii Vašich dat".to_string(),
        "Právě jste na stránkách recenze-společností zažádal/a o kopii vašich \
         uživatelských dat. Kopie vašich dat bude zaslána na Vaši emailovou adresu \
         do 30ti dnů. S pozdravem, tým Recenze-společností."
            .to_string(),
    )
}

/// Notice to administrators that a data-copy request needs fulfilling
pub fn data_request_admin_notice(user_email: &str, user_id: &str) -> (String, String) {
    (
        "Žádost o kopii uživatelských dat".to_string(),
        format!(
            "Uživatel s emailovou adresou {} s id {} právě požádal o kopii svých \
             uživatelských dat. Na splnění jeho požadavku máte 30 dnů.",
            user_email, user_id
        ),
    )
}

/// Account-deletion confirmation
pub fn account_deleted() -> (String, String) {
    (
        "Účet smazán".to_string(),
        "Váš uživatelský účet na stránkách recenze-společností byl smazán.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_submitted_mentions_details() {
        let (subject, body) = review_submitted("Seznam", "Skvělá firma.", 5);
        assert!(!subject.is_empty());
        assert!(body.contains("Seznam"));
        assert!(body.contains("Skvělá firma."));
        assert!(body.contains("5 z 5ti"));
    }

    #[test]
    fn test_email_changed_mentions_both_addresses() {
        let (_, body) = email_changed("stara@example.com", "nova@example.com");
        assert!(body.contains("stara@example.com"));
        assert!(body.contains("nova@example.com"));
    }

    #[test]
    fn test_rejection_cites_terms() {
        let (_, body) = review_rejected("https://firmrate.cz/terms");
        assert!(body.contains("https://firmrate.cz/terms"));
        assert!(body.contains("podmínkami"));
    }
}
