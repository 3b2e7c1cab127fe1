//! Plain-text message bodies for the notification paths. Rendering happens at
//! enqueue time so the outbox rows are self-contained.

use super::outbox::{NewNotification, NotificationKind};
use crate::buyers::Buyer;
use crate::properties::Property;

pub fn offer_received(buyer: &Buyer, property: &Property, offered_price: i64) -> NewNotification {
    NewNotification {
        kind: NotificationKind::OfferReceived,
        recipient: buyer.email.clone(),
        subject: format!("We received your offer on {}", property.address),
        body: format!(
            "Hi {},\n\n\
             Thanks for your offer of ${} on {}.\n\
             Our team will review it and follow up shortly.\n\n\
             — The Landivo Team",
            buyer.first_name, offered_price, property.address
        ),
    }
}

pub fn offer_updated(
    buyer: &Buyer,
    property: &Property,
    previous_price: i64,
    offered_price: i64,
) -> NewNotification {
    NewNotification {
        kind: NotificationKind::OfferUpdated,
        recipient: buyer.email.clone(),
        subject: format!("Your offer on {} was updated", property.address),
        body: format!(
            "Hi {},\n\n\
             Your offer on {} has been raised from ${} to ${}.\n\
             We will be in touch about next steps.\n\n\
             — The Landivo Team",
            buyer.first_name, property.address, previous_price, offered_price
        ),
    }
}

pub fn offer_below_minimum(
    buyer: &Buyer,
    property: &Property,
    offered_price: i64,
) -> NewNotification {
    NewNotification {
        kind: NotificationKind::OfferBelowMinimum,
        recipient: buyer.email.clone(),
        subject: format!("About your offer on {}", property.address),
        body: format!(
            "Hi {},\n\n\
             We received your offer of ${} on {}. It sits below the minimum\n\
             the seller is considering (${}), but it has been recorded and a\n\
             team member may reach out to discuss options.\n\n\
             — The Landivo Team",
            buyer.first_name, offered_price, property.address, property.minimum_offer
        ),
    }
}

pub fn campaign(buyer: &Buyer, subject: &str, body: &str) -> NewNotification {
    NewNotification {
        kind: NotificationKind::Campaign,
        recipient: buyer.email.clone(),
        subject: subject.to_string(),
        body: format!("Hi {},\n\n{}\n\n— The Landivo Team", buyer.first_name, body),
    }
}
