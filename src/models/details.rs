// Free-text inputs of the invoice form, in the order they appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    CompanyName,
    CompanyAddress,
    CompanyCity,
    CompanyPhone,
    CompanyEmail,
    ClientName,
    ClientCompany,
    ClientAddress,
    ClientCity,
    ClientPhone,
    ClientEmail,
    BankName,
    AccountNumber,
    IfscCode,
    AccountHolder,
    Comment,
}

impl DetailField {
    pub fn label(self) -> &'static str {
        match self {
            DetailField::CompanyName => "Company Name",
            DetailField::CompanyAddress => "Company Address",
            DetailField::CompanyCity => "Company City / ZIP",
            DetailField::CompanyPhone => "Company Phone",
            DetailField::CompanyEmail => "Company Email",
            DetailField::ClientName => "Client Name",
            DetailField::ClientCompany => "Client Company",
            DetailField::ClientAddress => "Client Address",
            DetailField::ClientCity => "Client City / ZIP",
            DetailField::ClientPhone => "Client Phone",
            DetailField::ClientEmail => "Client Email",
            DetailField::BankName => "Bank Name",
            DetailField::AccountNumber => "Account Number",
            DetailField::IfscCode => "IFSC Code",
            DetailField::AccountHolder => "Account Holder",
            DetailField::Comment => "Comment",
        }
    }
}

// Places in the printable preview that mirror a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewSlot {
    CompanyName,
    CompanyAddress,
    CompanyCityZip,
    CompanyPhone,
    CompanyEmail,
    FooterCompanyName,
    FooterContactPhone,
    FooterContactEmail,
    ClientName,
    ClientCompany,
    ClientAddress,
    ClientCityZip,
    ClientPhone,
    ClientEmail,
    BankName,
    AccountNumber,
    Ifsc,
    AccountHolder,
    Comment,
}

impl PreviewSlot {
    pub fn source(self) -> DetailField {
        match self {
            PreviewSlot::CompanyName | PreviewSlot::FooterCompanyName => DetailField::CompanyName,
            PreviewSlot::CompanyAddress => DetailField::CompanyAddress,
            PreviewSlot::CompanyCityZip => DetailField::CompanyCity,
            PreviewSlot::CompanyPhone | PreviewSlot::FooterContactPhone => DetailField::CompanyPhone,
            PreviewSlot::CompanyEmail | PreviewSlot::FooterContactEmail => DetailField::CompanyEmail,
            PreviewSlot::ClientName => DetailField::ClientName,
            PreviewSlot::ClientCompany => DetailField::ClientCompany,
            PreviewSlot::ClientAddress => DetailField::ClientAddress,
            PreviewSlot::ClientCityZip => DetailField::ClientCity,
            PreviewSlot::ClientPhone => DetailField::ClientPhone,
            PreviewSlot::ClientEmail => DetailField::ClientEmail,
            PreviewSlot::BankName => DetailField::BankName,
            PreviewSlot::AccountNumber => DetailField::AccountNumber,
            PreviewSlot::Ifsc => DetailField::IfscCode,
            PreviewSlot::AccountHolder => DetailField::AccountHolder,
            PreviewSlot::Comment => DetailField::Comment,
        }
    }

    /// Shown in place of an empty field.
    pub fn placeholder(self) -> &'static str {
        match self {
            PreviewSlot::CompanyName | PreviewSlot::FooterCompanyName => "[company name]",
            PreviewSlot::CompanyAddress => "[company address]",
            PreviewSlot::CompanyCityZip => "[company city zip]",
            PreviewSlot::CompanyPhone => "[company phone]",
            PreviewSlot::CompanyEmail => "[company email]",
            PreviewSlot::FooterContactPhone => "[contact phone]",
            PreviewSlot::FooterContactEmail => "[contact email]",
            PreviewSlot::ClientName => "[client name]",
            PreviewSlot::ClientCompany => "[client company]",
            PreviewSlot::ClientAddress => "[client address]",
            PreviewSlot::ClientCityZip => "[client city zip]",
            PreviewSlot::ClientPhone => "[client phone]",
            PreviewSlot::ClientEmail => "[client email]",
            PreviewSlot::BankName => "[bank name]",
            PreviewSlot::AccountNumber => "[account number]",
            PreviewSlot::Ifsc => "[ifsc]",
            PreviewSlot::AccountHolder => "[account holder]",
            PreviewSlot::Comment => "[comment]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_contact_fields_feed_header_and_footer() {
        assert_eq!(PreviewSlot::CompanyName.source(), DetailField::CompanyName);
        assert_eq!(PreviewSlot::FooterCompanyName.source(), DetailField::CompanyName);
        assert_eq!(PreviewSlot::FooterContactPhone.source(), DetailField::CompanyPhone);
        assert_eq!(PreviewSlot::FooterContactEmail.source(), DetailField::CompanyEmail);
    }

    #[test]
    fn placeholders_are_bracketed_lowercase() {
        for slot in [PreviewSlot::CompanyCityZip, PreviewSlot::Ifsc, PreviewSlot::FooterContactEmail] {
            let text = slot.placeholder();
            assert!(text.starts_with('[') && text.ends_with(']'), "{}", text);
            assert_eq!(text, text.to_lowercase());
        }
    }
}
