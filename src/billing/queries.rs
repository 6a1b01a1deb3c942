//! Admin API documents used by billing

/// Active charges of the current installation, used for the payment check.
pub const APP_INSTALLATION_CHARGES: &str = r#"
query appInstallationCharges {
  currentAppInstallation {
    activeSubscriptions {
      id
      name
      test
    }
    oneTimePurchases(first: 250, sortKey: CREATED_AT) {
      edges {
        node {
          name
          test
          status
        }
      }
    }
  }
}
"#;

/// Active subscriptions with their usage line items.
pub const APP_SUBSCRIPTION_LINE_ITEMS: &str = r#"
query appSubscription {
  currentAppInstallation {
    activeSubscriptions {
      id
      name
      test
      lineItems {
        id
        plan {
          pricingDetails {
            __typename
            ... on AppUsagePricing {
              terms
              balanceUsed {
                amount
              }
              cappedAmount {
                amount
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const APP_USAGE_RECORD_CREATE: &str = r#"
mutation appUsageRecordCreate($subscriptionLineItemId: ID!, $price: MoneyInput!, $description: String!) {
  appUsageRecordCreate(
    subscriptionLineItemId: $subscriptionLineItemId,
    description: $description,
    price: $price
  ) {
    userErrors {
      field
      message
    }
    appUsageRecord {
      id
    }
  }
}
"#;

pub const APP_SUBSCRIPTION_CREATE: &str = r#"
mutation appSubscriptionCreate($name: String!, $lineItems: [AppSubscriptionLineItemInput!]!, $returnUrl: URL!, $test: Boolean) {
  appSubscriptionCreate(
    name: $name,
    lineItems: $lineItems,
    returnUrl: $returnUrl,
    test: $test
  ) {
    confirmationUrl
    userErrors {
      field
      message
    }
  }
}
"#;

pub const APP_PURCHASE_ONE_TIME_CREATE: &str = r#"
mutation appPurchaseOneTimeCreate($name: String!, $price: MoneyInput!, $returnUrl: URL!, $test: Boolean) {
  appPurchaseOneTimeCreate(
    name: $name,
    price: $price,
    returnUrl: $returnUrl,
    test: $test
  ) {
    confirmationUrl
    userErrors {
      field
      message
    }
  }
}
"#;
