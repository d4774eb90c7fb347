//! Clients for resources that only need the standard operations.

resource_client!(
    /// Client for the `brand` slice.
    Brand
);
resource_client!(
    /// Client for the `category` slice.
    Category
);
resource_client!(
    /// Client for the `product` slice.
    Product
);
resource_client!(
    /// Client for the `discount` slice.
    Discount
);
resource_client!(
    /// Client for the `contact` slice.
    Contact
);
resource_client!(
    /// Client for the `page` slice.
    Page
);
resource_client!(
    /// Client for the `role` slice.
    Role
);
