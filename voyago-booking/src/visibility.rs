//! Role/ownership visibility, shared verbatim between read paths and
//! mutation guards so the two cannot drift apart.

use voyago_core::{Actor, Booking, BookingScope, Role};

/// Whether the actor may see this booking at all. Customers see their own,
/// employees see bookings assigned to them, admins see everything.
pub fn can_view(actor: &Actor, booking: &Booking) -> bool {
    match actor.role {
        Role::SuperAdmin => true,
        Role::Customer => booking.customer_id == actor.user_id,
        Role::Employee => booking
            .assignment
            .as_ref()
            .is_some_and(|a| a.employee_id == actor.user_id),
    }
}

/// The list filter equivalent of [`can_view`].
pub fn scope_for(actor: &Actor) -> BookingScope {
    match actor.role {
        Role::SuperAdmin => BookingScope::All,
        Role::Customer => BookingScope::ForCustomer(actor.user_id),
        Role::Employee => BookingScope::ForEmployee(actor.user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use voyago_core::{Assignment, BookingStatus};

    fn booking(customer_id: Uuid, employee_id: Option<Uuid>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_id,
            package_id: Uuid::new_v4(),
            travel_date: Utc::now(),
            travelers: 2,
            total_amount: 100_00,
            status: BookingStatus::Pending,
            receipt: None,
            assignment: employee_id.map(|employee_id| Assignment {
                employee_id,
                assigned_at: Utc::now(),
            }),
            created_at: Utc::now(),
        }
    }

    fn scope_admits(scope: BookingScope, booking: &Booking) -> bool {
        match scope {
            BookingScope::All => true,
            BookingScope::ForCustomer(id) => booking.customer_id == id,
            BookingScope::ForEmployee(id) => booking
                .assignment
                .as_ref()
                .is_some_and(|a| a.employee_id == id),
            BookingScope::Unassigned => booking.assignment.is_none(),
            BookingScope::Assigned => booking.assignment.is_some(),
        }
    }

    #[test]
    fn customer_sees_only_own_bookings() {
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        assert!(can_view(&customer, &booking(customer.user_id, None)));
        assert!(!can_view(&customer, &booking(Uuid::new_v4(), None)));
    }

    #[test]
    fn employee_sees_only_assigned_bookings() {
        let employee = Actor::new(Uuid::new_v4(), Role::Employee);
        assert!(can_view(&employee, &booking(Uuid::new_v4(), Some(employee.user_id))));
        assert!(!can_view(&employee, &booking(Uuid::new_v4(), Some(Uuid::new_v4()))));
        assert!(!can_view(&employee, &booking(Uuid::new_v4(), None)));
    }

    #[test]
    fn admin_sees_everything() {
        let admin = Actor::new(Uuid::new_v4(), Role::SuperAdmin);
        assert!(can_view(&admin, &booking(Uuid::new_v4(), None)));
    }

    #[test]
    fn scope_agrees_with_point_predicate() {
        let customer = Actor::new(Uuid::new_v4(), Role::Customer);
        let employee = Actor::new(Uuid::new_v4(), Role::Employee);
        let admin = Actor::new(Uuid::new_v4(), Role::SuperAdmin);

        let samples = vec![
            booking(customer.user_id, None),
            booking(customer.user_id, Some(employee.user_id)),
            booking(Uuid::new_v4(), Some(employee.user_id)),
            booking(Uuid::new_v4(), Some(Uuid::new_v4())),
            booking(Uuid::new_v4(), None),
        ];

        for actor in [&customer, &employee, &admin] {
            let scope = scope_for(actor);
            for b in &samples {
                assert_eq!(can_view(actor, b), scope_admits(scope, b));
            }
        }
    }
}
