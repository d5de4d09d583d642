//! Notice assembler.
//!
//! Pure templating over comparison items, contact info, and a selected
//! tone. Stateless and idempotent: identical inputs always produce
//! identical output text, modulo the current date. Sending or storing the
//! result is an external collaborator's responsibility.

use chrono::Utc;

use crate::domain::{ComparisonItem, ContactInfo, NoticeTone, NoticeType};

/// Render a legal notice document.
pub fn render(
    notice_type: NoticeType,
    items: &[ComparisonItem],
    contact: &ContactInfo,
    tone: NoticeTone,
) -> String {
    let date = Utc::now().format("%B %-d, %Y");
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", heading(notice_type)));
    out.push_str(&format!("Date: {}\n", date));
    out.push_str("To: Designated Copyright Agent\n\n");

    out.push_str(opening_clause(tone));
    out.push_str("\n\n");

    out.push_str("COPYRIGHT HOLDER\n");
    out.push_str(&format!("Name: {}\n", contact.name));
    if let Some(company) = &contact.company {
        out.push_str(&format!("Company: {}\n", company));
    }
    out.push_str(&format!("Email: {}\n", contact.email));
    if let Some(phone) = &contact.phone {
        out.push_str(&format!("Phone: {}\n", phone));
    }
    if let Some(address) = &contact.address {
        out.push_str(&format!("Address: {}\n", address));
    }
    out.push('\n');

    out.push_str("ORIGINAL WORK AND INFRINGING MATERIAL\n");
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "{}. Original work: {}\n   Infringing material: {}\n",
            idx + 1,
            item.original,
            item.infringing
        ));
    }
    out.push('\n');

    out.push_str(consequence_clause(tone));
    out.push_str("\n\n");

    out.push_str(
        "I have a good faith belief that the use of the material in the manner \
         complained of is not authorized by the copyright owner, its agent, or \
         the law.\n\n",
    );
    out.push_str(
        "I swear, under penalty of perjury, that the information in this \
         notification is accurate and that I am the copyright owner, or am \
         authorized to act on behalf of the owner, of an exclusive right that \
         is allegedly infringed.\n\n",
    );

    out.push_str(&format!("Signed: /{}/\n", contact.name));
    out.push_str(&format!("Dated: {}\n", date));

    out
}

fn heading(notice_type: NoticeType) -> &'static str {
    match notice_type {
        NoticeType::DmcaTakedown => "DMCA TAKEDOWN NOTICE",
        NoticeType::CeaseAndDesist => "CEASE AND DESIST - COPYRIGHT INFRINGEMENT",
    }
}

fn opening_clause(tone: NoticeTone) -> &'static str {
    match tone {
        NoticeTone::FormalLegal => {
            "Pursuant to 17 U.S.C. § 512(c)(3), I hereby submit formal \
             notification of copyright infringement and demand the immediate \
             removal of the material identified below."
        }
        NoticeTone::Urgent => {
            "This is an urgent notification of ongoing copyright infringement. \
             The material identified below is causing continuing commercial harm \
             and must be removed without delay."
        }
        NoticeTone::FriendlyFirm => {
            "I am writing to bring to your attention material hosted on your \
             service that infringes my copyright. I trust this is unintentional \
             on your part, and ask that you remove it promptly."
        }
        NoticeTone::Default => {
            "I am submitting this notice of copyright infringement regarding \
             material hosted on your service, identified below, and request its \
             removal."
        }
    }
}

fn consequence_clause(tone: NoticeTone) -> &'static str {
    match tone {
        NoticeTone::FormalLegal => {
            "Failure to expeditiously remove or disable access to the infringing \
             material may result in liability under applicable copyright law, and \
             all rights and remedies are expressly reserved."
        }
        NoticeTone::Urgent => {
            "If the material is not removed within 48 hours, we will pursue all \
             available legal remedies, including statutory damages, without \
             further notice."
        }
        NoticeTone::FriendlyFirm => {
            "I would prefer to resolve this without formal escalation, but I am \
             prepared to pursue the matter further if the material remains \
             available."
        }
        NoticeTone::Default => {
            "Please remove or disable access to the infringing material promptly. \
             I reserve all rights and remedies available under law."
        }
    }
}
